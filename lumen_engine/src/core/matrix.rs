use crate::core::types::{Number, Vector3, Vector4};
use crate::impl_op;
use approx::{AbsDiffEq, RelativeEq};
use bytemuck::{Pod, Zeroable};
use std::ops::Mul;

/// A 4x4 matrix using the **row-vector** convention.
///
/// Vectors are multiplied on the left (`v * M`), so `a * b` means "apply `a`, then `b`".
/// A model transform is therefore composed as `scale * rotation * translation`, and the translation
/// lives in the last row.
///
/// Internally this wraps a [glam::Mat4], whose columns are exactly our rows,
/// so the memory layout is row-major and can be handed to the GPU directly.
#[derive(Copy, Clone, Debug, PartialEq, Default, Pod, Zeroable)]
#[repr(transparent)]
pub struct Matrix4(glam::Mat4);

// region Constructors

impl Matrix4 {
    pub const IDENTITY: Self = Self(glam::Mat4::IDENTITY);

    pub fn from_rows(rows: [[Number; 4]; 4]) -> Self { Self(glam::Mat4::from_cols_array_2d(&rows)) }

    pub fn translation(t: Vector3) -> Self { Self(glam::Mat4::from_translation(t)) }

    pub fn inverse_translation(t: Vector3) -> Self { Self::translation(-t) }

    pub fn scale(s: Vector3) -> Self { Self(glam::Mat4::from_scale(s)) }

    /// Inverse of [Self::scale]. Zero scale components produce infinities, as there is no inverse
    pub fn inverse_scale(s: Vector3) -> Self { Self::scale(s.recip()) }

    /// Rotation from `(yaw, pitch, roll)` radians, stored in `x, y, z`
    pub fn rotation(r: Vector3) -> Self {
        let (sx, cx) = r.x.sin_cos();
        let (sy, cy) = r.y.sin_cos();
        let (sz, cz) = r.z.sin_cos();
        Self::from_rows([
            [cx * cy, cx * sy * sz - sx * cz, cx * sy * cz + sx * sz, 0.],
            [sx * cy, sx * sy * sz + cx * cz, sx * sy * cz - cx * sz, 0.],
            [-sy, cy * sz, cy * cz, 0.],
            [0., 0., 0., 1.],
        ])
    }

    /// Inverse of [Self::rotation]; the matrix is orthonormal so this is its transpose
    pub fn inverse_rotation(r: Vector3) -> Self { Self::rotation(r).transpose() }
}

// endregion Constructors

// region Accessors

impl Matrix4 {
    pub fn transpose(&self) -> Self { Self(self.0.transpose()) }

    /// The general inverse. Singular matrices produce non-finite elements
    pub fn inverse(&self) -> Self { Self(self.0.inverse()) }
}

// endregion Accessors

// region Transforming

impl Matrix4 {
    /// Transforms a point (`w = 1`), including the perspective divide
    pub fn transform_point(&self, p: Vector3) -> Vector3 { self.0.project_point3(p) }

    /// Transforms a direction (`w = 0`); translation has no effect
    pub fn transform_vector(&self, v: Vector3) -> Vector3 { self.0.transform_vector3(v) }
}

// Row vector times matrix: `v * M`
impl Mul<Matrix4> for Vector4 {
    type Output = Vector4;

    fn mul(self, rhs: Matrix4) -> Vector4 { rhs.0 * self }
}

// `a * b` applies `a` first, which for glam's column vectors is `b * a`
impl_op!(impl std::ops::Mul : fn mul(a: Matrix4, b: Matrix4) -> Matrix4 { Matrix4(b.0 * a.0) });

// endregion Transforming

// region Interop

impl AbsDiffEq for Matrix4 {
    type Epsilon = Number;

    fn default_epsilon() -> Number { Number::EPSILON }

    fn abs_diff_eq(&self, other: &Self, epsilon: Number) -> bool { self.0.abs_diff_eq(other.0, epsilon) }
}

impl RelativeEq for Matrix4 {
    fn default_max_relative() -> Number { Number::EPSILON }

    fn relative_eq(&self, other: &Self, epsilon: Number, max_relative: Number) -> bool {
        RelativeEq::relative_eq(&self.0, &other.0, epsilon, max_relative)
    }
}

// endregion Interop

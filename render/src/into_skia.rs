use psview::{Rgba, UserToDeviceSpace};

pub trait IntoSkia {
    type Output;
    fn into_skia(self) -> Self::Output;
}

impl IntoSkia for Rgba {
    type Output = tiny_skia::Color;

    fn into_skia(self) -> Self::Output {
        Self::Output::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl IntoSkia for UserToDeviceSpace {
    type Output = tiny_skia::Transform;

    fn into_skia(self) -> Self::Output {
        Self::Output::from_row(self.m11, self.m12, self.m21, self.m22, self.m31, self.m32)
    }
}

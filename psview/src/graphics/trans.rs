//! Coordinate spaces and transforms between them.

use euclid::Transform2D;

/// Space that script coordinates are written in.
pub enum UserSpace {}
/// Page coordinates, origin at bottom-left, y axis goes up.
pub enum PageSpace {}
/// Canvas pixels, origin at top-left, y axis goes down.
pub enum DeviceSpace {}

/// Current transform matrix, set by `translate` and `scale`.
pub type UserToPageSpace = Transform2D<f32, UserSpace, PageSpace>;
pub type PageToDeviceSpace = Transform2D<f32, PageSpace, DeviceSpace>;
pub type UserToDeviceSpace = Transform2D<f32, UserSpace, DeviceSpace>;

/// Flip y-axis and apply zoom, because scripts use left-bottom as origin.
pub fn page_to_device(page_height: f32, zoom: f32) -> PageToDeviceSpace {
    Transform2D::scale(zoom, -zoom).then_translate((0.0, page_height * zoom).into())
}

/// Return a transform converts user space to device space.
pub fn user_to_device(ctm: &UserToPageSpace, page_height: f32, zoom: f32) -> UserToDeviceSpace {
    ctm.then(&page_to_device(page_height, zoom))
}

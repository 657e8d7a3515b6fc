use crate::constants::MOBILE_BREAKPOINT;

/// Which frame variant a window size selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    pub fn for_width(width: i32) -> Self {
        if width <= MOBILE_BREAKPOINT {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// Directory suffix of the frame folders (`Scene1_PC`, `Scene1_MO`).
    pub fn suffix(self) -> &'static str {
        match self {
            DeviceClass::Desktop => "PC",
            DeviceClass::Mobile => "MO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::for_width(self.width)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 * 0.5, self.height as f32 * 0.5)
    }
}

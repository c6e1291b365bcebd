//! Panel backlight, a plain GPIO.

use esp_hal::gpio::{
    Level,
    Output,
    OutputConfig,
};

use crate::BacklightResources;

pub struct Backlight {
    pin: Output<'static>,
}

impl From<BacklightResources<'static>> for Backlight {
    /// Starts dark so the panel is not lit while it still shows noise.
    fn from(res: BacklightResources<'static>) -> Self {
        Self {
            pin: Output::new(res.led, Level::Low, OutputConfig::default()),
        }
    }
}

impl Backlight {
    pub fn set(&mut self, on: bool) {
        self.pin.set_level(Level::from(on));
    }
}

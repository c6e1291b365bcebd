//! The badge as a [`Platform`]: IR frames from the interrupt handoff, tilt
//! from the BMA222 and a fixed-rate frame ticker.

use embassy_time::{
    Duration,
    Ticker,
};
use esp_hal::{
    Blocking,
    i2c::master::{
        Config,
        I2c,
    },
    time::Rate,
};

use crate::{
    AccelResources,
    accel::Accelerometer,
    config::TICK_MS,
    game::Tilt,
    ir::RemoteFrame,
    receiver::Receiver,
    scene::Platform,
};

impl From<AccelResources<'static>> for Accelerometer<I2c<'static, Blocking>> {
    fn from(res: AccelResources<'static>) -> Self {
        let i2c = I2c::new(res.i2c, Config::default().with_frequency(Rate::from_khz(400)))
            .expect("accelerometer i2c config")
            .with_sda(res.sda)
            .with_scl(res.scl);
        Accelerometer::new(i2c)
    }
}

pub struct BadgePlatform {
    receiver: &'static Receiver,
    accel: Accelerometer<I2c<'static, Blocking>>,
    ticker: Ticker,
}

impl BadgePlatform {
    pub fn new(receiver: &'static Receiver, accel: AccelResources<'static>) -> Self {
        Self {
            receiver,
            accel: accel.into(),
            ticker: Ticker::every(Duration::from_millis(TICK_MS)),
        }
    }
}

impl Platform for BadgePlatform {
    fn take_frame(&mut self) -> Option<RemoteFrame> {
        let frame = self.receiver.try_take();
        if let Some(frame) = frame {
            trace!("ir: frame {=u32:#x}", frame.code());
        }
        frame
    }

    fn read_tilt(&mut self) -> Tilt {
        self.accel.read_or_level()
    }

    async fn wait_tick(&mut self) {
        self.ticker.next().await;
    }
}

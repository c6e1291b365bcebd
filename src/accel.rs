//! BMA222 accelerometer, read one signed byte per axis over I2C.

use embedded_hal::i2c::I2c;

use crate::game::Tilt;

pub const BMA222_ADDR: u8 = 0x18;
const REG_X: u8 = 0x03;
const REG_Y: u8 = 0x05;

pub struct Accelerometer<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Accelerometer<I> {
    pub const fn new(i2c: I) -> Self {
        Self {
            i2c,
            address: BMA222_ADDR,
        }
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn read_axis(&mut self, register: u8) -> Result<i8, I::Error> {
        let mut value = [0_u8; 1];
        self.i2c.write_read(self.address, &[register], &mut value)?;
        Ok(i8::from_ne_bytes(value))
    }

    pub fn read(&mut self) -> Result<Tilt, I::Error> {
        Ok(Tilt::new(self.read_axis(REG_X)?, self.read_axis(REG_Y)?))
    }

    /// Like [`read`](Self::read), but a bus error reads as level.
    pub fn read_or_level(&mut self) -> Tilt {
        self.read().unwrap_or_else(|_| {
            warn!("accelerometer read failed");
            Tilt::default()
        })
    }
}

//! ST7789 panel, 320×170 over SPI with DMA.
//!
//! The game only uses a 128×128 square in the middle of the panel; draw on
//! `display.translated(PLAYFIELD_ORIGIN)` to address it from (0, 0).

use embedded_graphics::prelude::Point;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    delay::Delay,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::{
        Config,
        Spi,
        SpiDmaBus,
    },
    time::Rate,
};
use mipidsi::{
    Builder,
    models::ST7789,
    options::{
        ColorInversion,
        Orientation,
        Rotation,
    },
};

use crate::{
    DisplayResources,
    config::GameConfig,
};

const PANEL_W: i32 = 320;
const PANEL_H: i32 = 170;
const DMA_LEN: usize = 32000;

/// Top-left corner of the centred playfield.
pub const PLAYFIELD_ORIGIN: Point = Point::new(
    (PANEL_W - GameConfig::DEFAULT.width) / 2,
    (PANEL_H - GameConfig::DEFAULT.height) / 2,
);

type Bus<'a> = ExclusiveDevice<SpiDmaBus<'a, Async>, Output<'a>, Delay>;
type Interface<'a> = mipidsi::interface::SpiInterface<'a, Bus<'a>, Output<'a>>;

/// The badge panel, drawable with `embedded-graphics` in RGB565.
pub type Display<'a> = mipidsi::Display<Interface<'a>, ST7789, Output<'a>>;

impl From<DisplayResources<'static>> for Display<'static> {
    fn from(res: DisplayResources<'static>) -> Self {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(DMA_LEN);
        let rx = DmaRxBuf::new(rx_descriptors, rx_buffer).expect("display rx dma buffer");
        let tx = DmaTxBuf::new(tx_descriptors, tx_buffer).expect("display tx dma buffer");

        let mut delay = Delay::new();
        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
        let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
        rst.set_high();

        let spi = Spi::new(res.spi, Config::default().with_frequency(Rate::from_mhz(80)))
            .expect("display spi config")
            .with_sck(res.sck)
            .with_mosi(res.mosi)
            .with_miso(res.miso)
            .with_dma(res.dma)
            .with_buffers(rx, tx)
            .into_async();
        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let bus = ExclusiveDevice::new(spi, cs, delay).expect("display chip select");

        let buffer = crate::mk_static!([u8; DMA_LEN], [0_u8; DMA_LEN]);
        let interface = mipidsi::interface::SpiInterface::new(bus, dc, buffer);

        Builder::new(ST7789, interface)
            .reset_pin(rst)
            .display_size(PANEL_H as u16, PANEL_W as u16)
            .invert_colors(ColorInversion::Inverted)
            .orientation(Orientation::new().rotate(Rotation::Deg90))
            .display_offset(35, 0)
            .init(&mut delay)
            .expect("st7789 init")
    }
}

#![no_std]
#![no_main]

mod config;
mod port;

use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_time::{Delay, Timer};
use smart_leds::SmartLedsWrite as _;
use ws2812_bitbang::{ColorIndex, PALETTE, Ws2812, resolve_color};
use {defmt_rtt as _, panic_probe as _};

use crate::config::{BRIGHTNESS, DATA_PIN, LOOPS, NUM_LEDS, STEP_MS, TIMING};
use crate::port::PortEmitter;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());

    let pin = Output::new(p.P0_13, Level::Low, OutputDrive::HighDrive);
    let emitter = PortEmitter::new(pin, DATA_PIN, LOOPS);
    let mut ws: Ws2812<_, _, NUM_LEDS> = Ws2812::new(emitter, Delay);

    defmt::info!("Running with {} LEDs, timing {}", NUM_LEDS, TIMING);

    // Wiring check: red, green, blue for one step.
    let check = [ColorIndex::RED, ColorIndex::GREEN, ColorIndex::BLUE]
        .map(|color| resolve_color(color, BRIGHTNESS));
    ws.write(check).unwrap_or_else(|e| match e {});
    Timer::after_millis(STEP_MS).await;

    ws.clear_and_show();

    let mut step = 0u8;
    loop {
        for i in 0..NUM_LEDS {
            let color = ColorIndex::from((step + i as u8) % PALETTE.len() as u8);
            ws.set_color(i, color, BRIGHTNESS);
        }
        ws.transmit();
        defmt::info!("step {}: {}", step, ws.frame());

        step = (step + 1) % PALETTE.len() as u8;
        Timer::after_millis(STEP_MS).await;
    }
}

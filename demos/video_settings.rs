//! Field tags, round trips and error reporting.
//!
//! Run with: cargo run --example video_settings

use serde::{Deserialize, Serialize};
use serde_ini::{from_str, to_string};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
struct Settings {
    #[serde(rename = "Video")]
    video: Video,
    #[serde(rename = "Audio")]
    audio: Option<Audio>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
struct Video {
    width: u32,
    height: u32,
    #[serde(rename = "fullscreen,omitempty,commented")]
    fullscreen: bool,
    #[serde(rename = ",inline")]
    window: Window,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
struct Window {
    #[serde(rename = "pos_x,omitempty")]
    x: i32,
    #[serde(rename = "pos_y,omitempty")]
    y: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Default)]
struct Audio {
    volume: f32,
    outputs: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings {
        video: Video {
            width: 1024,
            height: 768,
            fullscreen: true,
            window: Window { x: -40, y: 0 },
        },
        audio: Some(Audio {
            volume: 0.75,
            outputs: vec!["Speakers".to_string(), "Headset #1".to_string()],
        }),
    };

    let text = to_string(&settings)?;
    println!("INI output:\n{}", text);

    // The commented line documents the key without setting it.
    let back: Settings = from_str(&text)?;
    assert!(!back.video.fullscreen);
    assert_eq!(back.audio, settings.audio);
    println!("✓ Round-trip successful");

    println!("\nZero values:\n{}", to_string(&Settings::default())?);

    let broken = "[Video]\nwidth=1024\nheight=tall\n";
    if let Err(err) = from_str::<Settings>(broken) {
        println!("Decoding {:?} fails with:\n  {}", broken, err);
    }

    let unknown = "[Video]\n[Network]\nport=80\n";
    if let Err(err) = from_str::<Settings>(unknown) {
        println!("Decoding {:?} fails with:\n  {}", unknown, err);
    }

    Ok(())
}

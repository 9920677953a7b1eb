//! Built-in smoke, load, stress and demo scenarios.
mod presets;


pub use presets::ScenarioPreset;

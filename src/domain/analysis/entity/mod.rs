pub mod investor_pitch;

pub mod pitch;
pub mod pitch_answer;
pub mod pitch_document;
pub mod pitch_team;

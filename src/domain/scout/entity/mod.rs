pub mod daftar_scout;
pub mod scout;
pub mod scout_question;

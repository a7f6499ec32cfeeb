pub mod daftar;
pub mod daftar_investor;

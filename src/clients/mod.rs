pub mod dadata;

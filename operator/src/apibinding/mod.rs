mod controller;

pub use controller::run;

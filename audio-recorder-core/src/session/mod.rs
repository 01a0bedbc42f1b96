pub(crate) mod acquisition;
pub mod controller;
pub(crate) mod stop_signal;

pub mod calendar;
pub mod projection;
pub mod series;

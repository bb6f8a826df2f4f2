pub mod margin;
pub mod simulation;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformStatistics {
    pub year: i32,
    pub total_classes: u32,
    pub total_students: u32,
    /// All-time food weight from the ledger, not part of the yearly counters
    pub total_food_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatisticField {
    TotalClasses,
    TotalStudents,
}

impl StatisticField {
    pub fn column(&self) -> &'static str {
        match self {
            StatisticField::TotalClasses => "total_classes",
            StatisticField::TotalStudents => "total_students",
        }
    }
}

//! Items-delivered counter derived from completion percentage.
use crate::constants::WORLD_POPULATION;
use crate::numbers::{ceil_f64_to_u64, floor_f64_to_u64, u64_to_f64};

/// Total items needed to cover the world population.
#[must_use]
pub fn total_items(people_per_item: u32) -> u64 {
    let per_item = u64::from(people_per_item.max(1));
    ceil_f64_to_u64(u64_to_f64(WORLD_POPULATION) / u64_to_f64(per_item))
}

/// Items delivered after `completion_percentage` (0-100) of the journey.
#[must_use]
pub fn items_delivered(completion_percentage: f64, people_per_item: u32) -> u64 {
    let fraction = if completion_percentage.is_finite() {
        completion_percentage.clamp(0.0, 100.0) / 100.0
    } else {
        0.0
    };
    floor_f64_to_u64(u64_to_f64(total_items(people_per_item)) * fraction)
}

/// Group digits in threes with commas, e.g. `2,700,000,000`.
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

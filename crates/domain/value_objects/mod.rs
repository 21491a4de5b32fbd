pub mod deliveries;
pub mod delivery_cost;
pub mod delivery_errors;
pub mod hourly_rate;
pub mod shift_times;

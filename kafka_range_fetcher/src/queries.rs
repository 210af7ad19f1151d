pub mod read_time_range;

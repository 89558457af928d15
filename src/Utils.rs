//! utility modules used by the RAM calculator
/// saving sample points into csv or txt files, logger setup
pub mod logger;
/// charts of the approximation built with plotters
pub mod plots;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;


// Analysis: grouped averaging of sweep results.
// Reads the delimited rows once, keeps a running sum per x-value for each
// tracked column, then divides by the replicate count.

pub mod aggregator;
pub mod keyed_sum;

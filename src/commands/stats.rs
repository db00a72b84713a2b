use anyhow::Result;

use crate::metrics::{gather_metrics, MetricSnapshot};

/// Print current process metrics.
pub async fn run(prometheus: bool) -> Result<()> {
    if prometheus {
        print!("{}", gather_metrics());
        return Ok(());
    }

    let snapshot = MetricSnapshot::capture();
    println!("Search requests:     {}", snapshot.search_requests_total);
    println!("Avg search latency:  {:.4}s", snapshot.search_latency_avg);
    println!("Avg result count:    {:.1}", snapshot.search_results_avg);
    println!("Embedding requests:  {}", snapshot.embedding_requests_total);
    println!("Avg embed latency:   {:.4}s", snapshot.embedding_latency_avg);

    Ok(())
}

//! Final run report, printed to stdout after shutdown.

use std::sync::atomic::Ordering;

use crate::arena::Arena;
use crate::config::PRICE_MULTIPLIER;
use crate::order::{Order, OrderMessage};
use crate::order_book::OrderBook;
use crate::stats::EngineStats;

/// Render a fixed-point price as `whole.frac` with four decimal digits.
pub fn format_price(fixed: i64) -> String {
    let whole = fixed / PRICE_MULTIPLIER;
    let frac = (fixed % PRICE_MULTIPLIER).abs();
    format!("{whole}.{frac:04}")
}

pub fn print_report(stats: &EngineStats, elapsed_secs: f64, arena: &Arena, book: &OrderBook) {
    let received = stats.orders_received.load(Ordering::Relaxed);
    let processed = stats.orders_processed.load(Ordering::Relaxed);
    let fills = stats.total_fills.load(Ordering::Relaxed);
    let ring_full = stats.ring_buffer_full.load(Ordering::Relaxed);
    let pool_oom = stats.pool_exhausted.load(Ordering::Relaxed);

    let throughput = if elapsed_secs > 0.0 {
        processed as f64 / elapsed_secs
    } else {
        0.0
    };
    let avg_latency_ns = if throughput > 0.0 { 1e9 / throughput } else { 0.0 };

    println!();
    println!("================================================================");
    println!("  MATCHING ENGINE - FINAL REPORT");
    println!("================================================================");
    println!();
    println!("   {:<30} {:>20}", "Orders Received", received);
    println!("   {:<30} {:>20}", "Orders Processed", processed);
    println!("   {:<30} {:>20}", "Total Fills (units)", fills);
    println!("   {:<30} {:>20}", "Matches", book.match_count());
    println!("   {:<30} {:>20}", "Cancels", book.cancel_count());
    println!("   {:<30} {:>18.2} s", "Elapsed Time", elapsed_secs);
    println!("   {:<30} {:>14.0} ops/s", "Throughput", throughput);
    println!("   {:<30} {:>17.0} ns", "Avg Latency (estimate)", avg_latency_ns);
    println!();
    println!("   {:<30} {:>20}", "Ring Buffer Full Events", ring_full);
    println!("   {:<30} {:>20}", "Pool Exhausted Events", pool_oom);
    println!(
        "   {:<30} {:>13.2} / {:.0} MB",
        "Arena Memory Used",
        arena.used() as f64 / (1024.0 * 1024.0),
        arena.capacity() as f64 / (1024.0 * 1024.0)
    );
    println!(
        "   {:<30} {:>18} B",
        "sizeof(Order)",
        std::mem::size_of::<Order>()
    );
    println!(
        "   {:<30} {:>18} B",
        "sizeof(OrderMessage)",
        std::mem::size_of::<OrderMessage>()
    );
    println!(
        "   {:<30} {:>20}",
        "Best Bid",
        format_price(book.best_bid_price())
    );
    println!(
        "   {:<30} {:>20}",
        "Best Ask",
        format_price(book.best_ask_price())
    );
    println!();
    println!("================================================================");

    let throughput_ok = throughput >= 500_000.0;
    println!(
        "   Throughput >= 500K ops/s:    {} ({:.0} ops/s)",
        if throughput_ok { "PASSED" } else { "BELOW TARGET" },
        throughput
    );
    println!(
        "   Zero-Alloc Hot Path:         {}",
        if pool_oom == 0 {
            "PASSED"
        } else {
            "POOL EXHAUSTION DETECTED"
        }
    );
    println!("================================================================");
    println!();
}

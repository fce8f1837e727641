use crate::{collab::CollaborationServer, models::DiagnosticsResponse};
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

struct ProcessUsage {
    cpu: f32,
    used: u64,
    free: u64,
    total: u64,
}

/// Sample host CPU and memory. A poisoned monitor reports zeros.
fn sample_usage() -> ProcessUsage {
    let monitor = SYSTEM_MONITOR.get_or_init(|| Mutex::new(System::new_all()));
    let Ok(mut sys) = monitor.lock() else {
        return ProcessUsage { cpu: 0.0, used: 0, free: 0, total: 0 };
    };
    sys.refresh_cpu();
    sys.refresh_memory();
    ProcessUsage {
        cpu: sys.global_cpu_info().cpu_usage(),
        used: sys.used_memory(),
        free: sys.free_memory(),
        total: sys.total_memory(),
    }
}

/// Session and process diagnostics
pub async fn diagnostics(
    State(server): State<Arc<CollaborationServer>>,
) -> (StatusCode, Json<DiagnosticsResponse>) {
    let stats = server.stats().await;
    let usage = sample_usage();

    info!(
        "Diagnostics: {} clients ({} active), {} selections, {} cells, CPU {:.2}%, Mem {}/{} MB",
        stats.registered,
        stats.active,
        stats.selections,
        stats.cells,
        usage.cpu,
        usage.used / 1024 / 1024,
        usage.total / 1024 / 1024,
    );

    (
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_clients: stats.registered as u32,
            n_active: stats.active as u32,
            n_selections: stats.selections as u32,
            n_cells: stats.cells as u32,
            cpu_usage: usage.cpu,
            memory_alloc: usage.used,
            memory_total: usage.total,
            memory_free: usage.free,
        }),
    )
}

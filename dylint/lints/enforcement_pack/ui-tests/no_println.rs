// Test case for NO_PRINTLN lint

fn bad_println() {
    println!("blocked: /api/execute-timeout");
}

fn bad_eprintln() {
    eprintln!("backend unreachable");
}

fn bad_dbg() {
    let body = "{\"status\":\"APPROVED\"}";
    dbg!(body);
}

// Good: using tracing
fn good_tracing() {
    tracing::warn!(trace_id = "/api/execute-timeout", "guarded call blocked");
}

fn main() {
    bad_println();
    bad_eprintln();
    bad_dbg();
    good_tracing();
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::*;
use tracing::{info, info_span};

use crate::commands::{ProbeMethod, SweepArgs};
use crate::pprint;
use crate::terminal::{
    colors, input::InputHandle, matrix::MatrixSink, print, progress::ProgressSink,
    report::ReportWriter,
};
use pingmap_common::{config::Config, network::subnet::AddressPolicy, status::ScanStatus};
use pingmap_core::coordinator::{ScanCoordinator, ScanRequest};
use pingmap_core::probe::{ProbeClient, SystemPing, TcpProbe};
use pingmap_core::sink::{FanoutSink, ScanSummary};

pub async fn sweep(args: SweepArgs, cfg: &Config) -> anyhow::Result<()> {
    let probe: Arc<dyn ProbeClient> = match args.method {
        ProbeMethod::Ping => Arc::new(SystemPing::new()),
        ProbeMethod::Tcp => Arc::new(TcpProbe::new(args.port)),
    };
    let policy = if args.hosts_only { AddressPolicy::HostsOnly } else { AddressPolicy::All };
    let request = ScanRequest::new(args.cidr.as_str())
        .workers(args.workers)
        .timeout(Duration::from_millis(args.timeout))
        .policy(policy);

    print_parameters(&args, probe.as_ref(), cfg);

    let span = info_span!("sweep", indicatif.pb_show = true);
    let matrix_span = (!cfg.no_matrix && cfg.quiet < 2)
        .then(|| info_span!(parent: &span, "matrix", indicatif.pb_show = true));

    let mut sinks = FanoutSink::new().with(Arc::new(ProgressSink::new(span.clone())));
    if !cfg.no_matrix {
        let matrix = MatrixSink::new(cfg.quiet);
        let matrix = match &matrix_span {
            Some(live) => matrix.with_live_view(live.clone()),
            None => matrix,
        };
        sinks.push(Arc::new(matrix));
    }
    let report = args.output.clone().map(|path| Arc::new(ReportWriter::new(path)));
    if let Some(report) = &report {
        sinks.push(report.clone());
    }

    let coordinator = ScanCoordinator::new(probe, Arc::new(sinks));

    let guard = span.enter();
    let matrix_guard = matrix_span.as_ref().map(|live| live.enter());
    let handle = coordinator
        .start(request)
        .await
        .with_context(|| format!("cannot sweep {}", args.cidr))?;

    let listener: Option<InputHandle> = match cfg.disable_input {
        true => None,
        false => {
            let coordinator = coordinator.clone();
            InputHandle::start(move || {
                let _ = coordinator.cancel();
            })
        }
    };
    if listener.is_some() {
        info!("Press 'q' to stop the sweep");
    }

    let wait = handle.wait();
    tokio::pin!(wait);
    let summary: ScanSummary = tokio::select! {
        result = &mut wait => result?,
        _ = tokio::signal::ctrl_c() => {
            let _ = coordinator.cancel();
            wait.await?
        }
    };

    // Closing both spans takes the bars off screen before the results print.
    drop(listener);
    drop(matrix_guard);
    drop(guard);
    drop(coordinator);
    drop(matrix_span);
    drop(span);

    sweep_ends(&summary, cfg);

    if let Some(report) = &report {
        report.result()?;
        info!("Active hosts written to {}", report.path().display());
    }
    Ok(())
}

fn print_parameters(args: &SweepArgs, probe: &dyn ProbeClient, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }

    let method: String = match args.method {
        ProbeMethod::Ping => probe.name().to_string(),
        ProbeMethod::Tcp => format!("{} (port {})", probe.name(), args.port),
    };
    let rows: Vec<(&str, String)> = vec![
        ("Target", args.cidr.clone()),
        ("Workers", args.workers.to_string()),
        ("Timeout", format!("{}ms", args.timeout)),
        ("Probe", method),
        (
            "Addresses",
            if args.hosts_only { "hosts only" } else { "whole block" }.to_string(),
        ),
    ];

    print::set_key_width(rows.iter().map(|(key, _)| *key));
    for (key, value) in rows {
        print::aligned_line(key, value);
    }
}

fn sweep_ends(summary: &ScanSummary, cfg: &Config) {
    let active = summary.active();

    if active.is_empty() {
        print::header("zero hosts detected", cfg.quiet);
        print::no_results();
    } else {
        if cfg.quiet > 0 {
            pprint!();
        }
        print::header("active hosts", cfg.quiet);
        for (idx, addr) in active.iter().enumerate() {
            print::tree_head(idx, &addr.to_string());
        }
    }

    print_summary(summary, active.len(), cfg);
    print::end_of_program();
}

fn print_summary(summary: &ScanSummary, active: usize, cfg: &Config) {
    let total_time: ColoredString = format!("{:.2}s", summary.elapsed.as_secs_f64()).bold().yellow();
    let output: ColoredString = if summary.is_cancelled() {
        let probed: ColoredString = format!("{}/{}", summary.completed, summary.total).bold();
        let free = summary.table.count(ScanStatus::Free);
        format!(
            "Sweep cancelled: {probed} probed, {} active, {free} free in {total_time}",
            format!("{active}").bold().green()
        )
        .color(colors::TEXT_DEFAULT)
    } else {
        let active_hosts: ColoredString = format!("{active} active hosts").bold().green();
        format!("Sweep complete: {active_hosts} identified in {total_time}").color(colors::TEXT_DEFAULT)
    };

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => {
            pprint!();
            print::print(&output.to_string());
        }
    }
}

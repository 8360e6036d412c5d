use crate::output::{print_json, print_table};
use anyhow::anyhow;
use serde::Serialize;
use std::path::Path;
use yt2mp3_core::config::Config;
use yt2mp3_core::paths;
use yt2mp3_core::runner::{detect_pip, tool_available};

#[derive(Debug, Serialize)]
struct CheckItem {
    name: String,
    present: bool,
    detail: String,
    required: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    items: Vec<CheckItem>,
    warnings: Vec<String>,
    ok: bool,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load(root).map_err(|e| anyhow!("{e}"))?;

    let pip = detect_pip();
    let manifest = paths::manifest_path(root, &cfg.deps.manifest);
    let app = paths::app_script_path(root, &cfg.server.app_script);
    let have_ffmpeg = tool_available(&cfg.system.package);
    let have_apt = tool_available("apt-get");

    let items = vec![
        CheckItem {
            name: "pip".into(),
            present: pip.is_some(),
            detail: pip.map_or_else(|| "not on PATH".into(), |p| p.program().into()),
            required: true,
        },
        CheckItem {
            name: "streamlit".into(),
            present: tool_available("streamlit"),
            detail: "server runtime".into(),
            required: true,
        },
        CheckItem {
            name: cfg.system.package.clone(),
            present: have_ffmpeg,
            detail: if have_ffmpeg {
                "already installed".into()
            } else {
                "will be installed at boot".into()
            },
            // Installable at boot as long as the package manager exists.
            required: !have_apt,
        },
        CheckItem {
            name: "apt-get".into(),
            present: have_apt,
            detail: "system package manager".into(),
            required: !have_ffmpeg,
        },
        CheckItem {
            name: cfg.deps.manifest.clone(),
            present: manifest.exists(),
            detail: manifest.display().to_string(),
            required: true,
        },
        CheckItem {
            name: cfg.server.app_script.clone(),
            present: app.exists(),
            detail: app.display().to_string(),
            required: true,
        },
    ];

    let warnings: Vec<String> = cfg.validate().into_iter().map(|w| w.message).collect();
    let ok = items.iter().all(|i| i.present || !i.required);

    let report = CheckReport {
        items,
        warnings,
        ok,
    };

    if json {
        print_json(&report)?;
    } else {
        let rows = report
            .items
            .iter()
            .map(|i| {
                vec![
                    i.name.clone(),
                    if i.present { "ok".into() } else { "missing".into() },
                    i.detail.clone(),
                ]
            })
            .collect();
        print_table(&["CHECK", "STATUS", "DETAIL"], rows);
        for w in &report.warnings {
            println!("warning: {w}");
        }
    }

    if !report.ok {
        return Err(anyhow!("environment is not ready; see the checks above"));
    }
    Ok(())
}

use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, WrapErr, miette};
use rayon::prelude::*;
use std::fs;

fn usage() -> ! {
    eprintln!("Usage: cargo xtask <command>");
    eprintln!("Commands:");
    eprintln!("  render <scene.grythm> <outdir> [--png]   Run a scene and write its frames");
    eprintln!("  check <dir>                              Run every scene in a directory");
    eprintln!("  blip <out.pcm>                           Write the trigger blip as raw PCM");
    std::process::exit(1);
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["render", scene, outdir, rest @ ..] => {
            let png = match rest {
                [] => false,
                ["--png"] => true,
                _ => usage(),
            };
            render(Utf8Path::new(scene), Utf8Path::new(outdir), png)
        }
        ["check", dir] => check(Utf8Path::new(dir)),
        ["blip", out] => blip(Utf8Path::new(out)),
        _ => usage(),
    }
}

fn render(scene: &Utf8Path, outdir: &Utf8Path, png: bool) -> miette::Result<()> {
    let source = fs::read_to_string(scene)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {scene}"))?;
    let outcome = grythm::run_script(scene.as_str(), &source)?;
    tracing::info!(
        frames = outcome.frames.len(),
        triggers = outcome.log.len(),
        ticks = outcome.scene.tick_count(),
        "scene finished"
    );

    fs::create_dir_all(outdir)
        .into_diagnostic()
        .wrap_err_with(|| format!("creating {outdir}"))?;

    outcome
        .frames
        .par_iter()
        .try_for_each(|frame| -> miette::Result<()> {
            let stem = format!("frame-{:05}", frame.tick);
            let svg_path = outdir.join(format!("{stem}.svg"));
            fs::write(&svg_path, &frame.svg)
                .into_diagnostic()
                .wrap_err_with(|| format!("writing {svg_path}"))?;
            if png {
                let png_path = outdir.join(format!("{stem}.png"));
                let bytes = svg_to_png(&frame.svg)?;
                fs::write(&png_path, bytes)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("writing {png_path}"))?;
            }
            Ok(())
        })?;

    let log_path = outdir.join("triggers.txt");
    fs::write(&log_path, outcome.log.to_text())
        .into_diagnostic()
        .wrap_err_with(|| format!("writing {log_path}"))?;

    eprintln!(
        "{} frames, {} triggers -> {outdir}",
        outcome.frames.len(),
        outcome.log.len()
    );
    Ok(())
}

fn svg_to_png(svg: &str) -> miette::Result<Vec<u8>> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).into_diagnostic()?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| miette!("cannot allocate a {width}x{height} pixmap"))?;

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    pixmap.encode_png().into_diagnostic()
}

/// Run every `.grythm` file under `dir` in parallel and report failures.
fn check(dir: &Utf8Path) -> miette::Result<()> {
    let mut scenes: Vec<Utf8PathBuf> = Vec::new();
    for entry in dir.read_dir_utf8().into_diagnostic()? {
        let entry = entry.into_diagnostic()?;
        if entry.path().extension() == Some("grythm") {
            scenes.push(entry.path().to_owned());
        }
    }
    scenes.sort();

    let failures: Vec<(Utf8PathBuf, miette::Report)> = scenes
        .par_iter()
        .filter_map(|path| {
            let result = fs::read_to_string(path)
                .into_diagnostic()
                .and_then(|source| grythm::run_script(path.as_str(), &source));
            result.err().map(|e| (path.clone(), e))
        })
        .collect();

    for (path, report) in &failures {
        eprintln!("FAIL {path}\n{report:?}");
    }
    eprintln!("{} scenes, {} failed", scenes.len(), failures.len());
    if failures.is_empty() {
        Ok(())
    } else {
        Err(miette!("{} scene(s) failed", failures.len()))
    }
}

fn blip(out: &Utf8Path) -> miette::Result<()> {
    let blip = grythm::Blip::default();
    fs::write(out, blip.pcm())
        .into_diagnostic()
        .wrap_err_with(|| format!("writing {out}"))?;
    eprintln!(
        "{} frames of 16-bit stereo at {} Hz -> {out}",
        blip.frames(),
        blip.sample_rate
    );
    Ok(())
}

//! Headless run: transpile and assemble fragments without a browser.
//!
//! Nothing executes. The assembled document is written to `-o` or stdout,
//! ready to be opened in a sandboxed frame.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::args::RunArgs;
use crate::config::{LabConfig, SandboxConfig};
use crate::lab::document::{assemble_titled, combine_scripts};
use crate::lab::{ExecutionDocument, FragmentSet, LabError, Lang, Transpiler};
use crate::log;

/// Execute the run command
pub fn run_headless(args: &RunArgs, config: &LabConfig) -> Result<()> {
    let fragments = read_fragments(args)?;
    let document = build_document(&fragments, &config.sandbox)
        .map_err(|e| anyhow::anyhow!("run rejected: {e}"))?;

    if let Some(ref output) = args.output {
        fs::write(output, document.as_str())
            .with_context(|| format!("writing {}", output.display()))?;
        log!("lab"; "wrote {} ({})", output.display(), document.fingerprint());
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_str().as_bytes())?;
        writeln!(stdout)?;
    }
    Ok(())
}

fn read_fragments(args: &RunArgs) -> Result<FragmentSet> {
    let mut fragments = FragmentSet::empty();
    let sources = [
        (Lang::Markup, &args.html),
        (Lang::Style, &args.css),
        (Lang::Script, &args.js),
        (Lang::TypedScript, &args.ts),
    ];
    for (lang, path) in sources {
        if let Some(path) = path {
            fragments[lang] = read_fragment(path)?;
        }
    }
    Ok(fragments)
}

fn read_fragment(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Compile and assemble. The transpiler is only loaded when there is
/// TypeScript to compile.
pub fn build_document(
    fragments: &FragmentSet,
    sandbox: &SandboxConfig,
) -> Result<ExecutionDocument, LabError> {
    let compiled = if fragments.has_typed_script() {
        Transpiler::load_blocking(&sandbox.target).compile(&fragments.typed_script)?
    } else {
        String::new()
    };
    let script = combine_scripts(&fragments.script, &compiled);
    Ok(assemble_titled(
        &sandbox.title,
        &fragments.markup,
        &fragments.style,
        &script,
    ))
}

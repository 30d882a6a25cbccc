//! Environment and configuration diagnostics.

use std::path::Path;

use super::CommandResult;
use hidscope::manifest;
use hidscope_transport::PlatformTarget;

/// Print the native link requirements for a platform target and validate the
/// module manifest.
pub fn doctor(target: Option<&str>, json: bool) -> CommandResult {
    let target = match target {
        Some(name) => name.parse::<PlatformTarget>()?,
        None => PlatformTarget::current()?,
    };
    let spec = target.link_spec();
    let manifest_result = manifest::validate();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "target": target,
                "link_spec": spec,
                "manifest_valid": manifest_result.is_ok(),
            }))?
        );
        return manifest_result.map_err(Into::into);
    }

    println!("Platform target: {target}");
    print_values("Definitions", spec.definitions);
    print_values("Frameworks", spec.frameworks);
    print_values("System include paths", spec.system_include_paths);
    print_values("System library paths", spec.system_library_paths);
    print_values("System libraries", spec.system_libraries);

    // Path checks only make sense when describing the machine we run on
    if target == PlatformTarget::Linux && PlatformTarget::current() == Ok(PlatformTarget::Linux) {
        for path in spec
            .system_include_paths
            .iter()
            .chain(spec.system_library_paths)
        {
            let status = if Path::new(path).is_dir() {
                "ok"
            } else {
                "MISSING"
            };
            println!("  check {path}: {status}");
        }
    }

    println!("Modules:");
    for module in manifest::MODULES {
        println!("  {module}");
    }
    match &manifest_result {
        Ok(()) => println!("Module manifest: ok ({} modules)", manifest::MODULES.len()),
        Err(e) => println!("Module manifest: INVALID - {e}"),
    }
    manifest_result.map_err(Into::into)
}

fn print_values(label: &str, values: &[&str]) {
    if values.is_empty() {
        println!("  {label}: (none)");
    } else {
        println!("  {label}: {}", values.join(", "));
    }
}

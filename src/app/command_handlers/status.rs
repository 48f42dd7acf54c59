use crate::app::command_support::open_service;

pub fn cmd_status() -> Result<String, String> {
    let service = open_service()?;
    let paths = service.paths();
    let mut lines = vec![
        format!("state_root={}", paths.root.display()),
        format!("settings_file={}", paths.settings_file().display()),
        format!("vault_file={}", paths.vault_file().display()),
        format!("revision={}", service.store().revision()),
        format!("contexts={}", service.registry().len()),
    ];
    for (context, root) in service.registry().live() {
        let chain = root
            .chain()
            .iter()
            .map(|worker| format!("{}@{}", worker.id(), worker.config().revision))
            .collect::<Vec<_>>()
            .join(" -> ");
        lines.push(format!("context.{context}={chain}"));
    }
    service.shutdown();
    Ok(lines.join("\n"))
}

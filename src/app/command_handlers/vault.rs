use crate::app::command_support::open_service;

pub fn cmd_vault(args: &[String]) -> Result<String, String> {
    match args.first().map(String::as_str) {
        Some("set") => {
            if args.len() < 3 {
                return Err("usage: vault set <KEY> <value>".to_string());
            }
            let service = open_service()?;
            service
                .vault()
                .set(&args[1], &args[2])
                .map_err(|err| err.to_string())?;
            Ok(format!("vault.{}=set", args[1]))
        }
        Some("unset") => {
            let key = args
                .get(1)
                .ok_or_else(|| "usage: vault unset <KEY>".to_string())?;
            let service = open_service()?;
            service.vault().set(key, "").map_err(|err| err.to_string())?;
            Ok(format!("vault.{key}=unset"))
        }
        Some(other) => Err(format!("unknown vault subcommand `{other}`")),
        None => Err("usage: vault <set|unset> ...".to_string()),
    }
}

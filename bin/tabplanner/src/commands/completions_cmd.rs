use clap_complete::{generate, Shell};

/// Generate shell completion scripts for `cmd`.
pub async fn run(shell: &str, mut cmd: clap::Command) -> anyhow::Result<()> {
    let shell = match shell.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" | "ps" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Options: bash, zsh, fish, powershell, elvish",
                shell
            );
        }
    };

    generate(shell, &mut cmd, "tabplanner", &mut std::io::stdout());

    eprintln!();
    eprintln!("# Usage:");
    match shell {
        Shell::Bash => {
            eprintln!("#   tabplanner completions bash > ~/.local/share/bash-completion/completions/tabplanner");
            eprintln!("#   or: eval \"$(tabplanner completions bash)\"");
        }
        Shell::Zsh => {
            eprintln!("#   tabplanner completions zsh > ~/.zfunc/_tabplanner");
            eprintln!("#   Make sure fpath includes ~/.zfunc and run compinit");
        }
        Shell::Fish => {
            eprintln!("#   tabplanner completions fish > ~/.config/fish/completions/tabplanner.fish");
        }
        _ => {}
    }

    Ok(())
}

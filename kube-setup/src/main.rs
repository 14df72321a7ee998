use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use kubeconf::{
    delete_kube_config_context, direct, path::default_config_path, read_config_or_new,
    setup_kube_config, KubeConfigSetup,
};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Set up and inspect kubeconfig files")]
struct Args {
    /// Kubeconfig file [default: first entry of $KUBECONFIG, else ~/.kube/config]
    #[clap(long, global = true, parse(from_os_str))]
    kubeconfig: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add or replace a cluster, user and context sharing one name
    Setup {
        #[clap(long)]
        name: String,
        /// Address of the API server, e.g. https://192.168.99.100:8443
        #[clap(long)]
        server: String,
        #[clap(long, parse(from_os_str))]
        client_certificate: Option<PathBuf>,
        #[clap(long, parse(from_os_str))]
        client_key: Option<PathBuf>,
        #[clap(long, parse(from_os_str))]
        certificate_authority: Option<PathBuf>,
        /// Don't switch to the new context if one is already current
        #[clap(long)]
        keep_context: bool,
        /// Store certificate contents rather than paths
        #[clap(long)]
        embed_certs: bool,
    },
    /// Print the current context and its namespace
    Current,
    /// Print the kubeconfig
    View {
        /// Embed referenced certificate files
        #[clap(long)]
        inline: bool,
    },
    /// Remove the cluster, user and context with this name
    Delete { name: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let kube_config_file = match args.kubeconfig {
        Some(path) => path,
        None => default_config_path().context("Could not determine the home directory")?,
    };
    debug!(path = %kube_config_file.display(), "Using kube config");

    match args.command {
        Command::Setup {
            name,
            server,
            client_certificate,
            client_key,
            certificate_authority,
            keep_context,
            embed_certs,
        } => {
            let setup = KubeConfigSetup {
                kube_config_file,
                cluster_name: name,
                cluster_server_address: server,
                client_certificate,
                client_key,
                certificate_authority,
                keep_context,
                embed_certs,
            };
            setup_kube_config(&setup).context("Setting up kube config")?;
        }
        Command::Current => {
            let kc = read_config_or_new(&kube_config_file)?;
            if kc.current_context.is_empty() {
                bail!("No current context set");
            }
            let context = kc
                .current_context_spec()
                .context("No matching context found")?;
            println!("{}", kc.current_context);
            match &context.namespace {
                Some(ns) => println!("{ns}"),
                None => println!("No namespace"),
            }
        }
        Command::View { inline } => {
            let mut kc = read_config_or_new(&kube_config_file)?;
            if inline {
                kc.inline()?;
            }
            serde_yaml::to_writer(std::io::stdout(), &direct::KubeConfig::from(kc))?;
        }
        Command::Delete { name } => {
            if !delete_kube_config_context(&kube_config_file, &name)? {
                bail!("Nothing named {name} in {}", kube_config_file.display());
            }
        }
    }

    Ok(())
}

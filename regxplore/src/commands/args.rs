//! Shared CLI flags for building a [`RegistryClient`](regxplore_core::RegistryClient)
//! against any provider, flattened into each registry-facing subcommand.

use clap::Args;
use regxplore_core::{Credential, EmptyTagPolicy, ProviderKind, RegistryOptions};

#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// Registry host, e.g. `registry-1.docker.io`, `quay.io`, `myharbor.example.com`.
    pub host: String,

    /// Provider dialect to speak. Defaults to sniffing the host.
    #[arg(long, value_enum, default_value = "generic")]
    pub kind: ProviderKindArg,

    /// Basic auth username.
    #[arg(short, long, env = "REGXPLORE_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(short, long, env = "REGXPLORE_PASSWORD")]
    pub password: Option<String>,

    /// Pre-obtained bearer token, used instead of username/password.
    #[arg(long, env = "REGXPLORE_TOKEN")]
    pub token: Option<String>,

    /// Use `http://` instead of `https://`.
    #[arg(long)]
    pub insecure: bool,

    /// Skip TLS certificate validation.
    #[arg(long)]
    pub skip_tls_verify: bool,

    /// Harbor project to scope catalog listing to; empty lists globally.
    #[arg(long, default_value = "")]
    pub project: String,

    /// Quay namespace/organization to scope catalog listing to.
    #[arg(long, default_value = "")]
    pub namespace: String,

    /// Quay: restrict the catalog to public repositories.
    #[arg(long)]
    pub public: bool,

    /// Skip a repository whose latest tag can't be resolved instead of
    /// erroring (the default is to skip; pass to make it an error).
    #[arg(long)]
    pub error_on_empty_tags: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default)]
pub enum ProviderKindArg {
    #[default]
    Generic,
    Harbor,
    Quay,
    Gcr,
    Ecr,
    GitLab,
    Azure,
    Nexus,
}

impl From<ProviderKindArg> for ProviderKind {
    fn from(kind: ProviderKindArg) -> Self {
        match kind {
            ProviderKindArg::Generic => ProviderKind::Generic,
            ProviderKindArg::Harbor => ProviderKind::Harbor,
            ProviderKindArg::Quay => ProviderKind::Quay,
            ProviderKindArg::Gcr => ProviderKind::Gcr,
            ProviderKindArg::Ecr => ProviderKind::Ecr,
            ProviderKindArg::GitLab => ProviderKind::GitLab,
            ProviderKindArg::Azure => ProviderKind::Azure,
            ProviderKindArg::Nexus => ProviderKind::Nexus,
        }
    }
}

impl RegistryArgs {
    pub fn credential(&self) -> Credential {
        if let Some(token) = &self.token {
            Credential::bearer(token.clone())
        } else if let (Some(u), Some(p)) = (&self.username, &self.password) {
            Credential::basic(u.clone(), p.clone())
        } else {
            Credential::default()
        }
    }

    pub fn options(&self) -> RegistryOptions {
        RegistryOptions {
            insecure: self.insecure,
            skip_tls_verify: self.skip_tls_verify,
            project: self.project.clone(),
            namespace: self.namespace.clone(),
            public: self.public,
            kind: self.kind.into(),
            empty_tag_policy: if self.error_on_empty_tags {
                EmptyTagPolicy::Error
            } else {
                EmptyTagPolicy::Skip
            },
            ..RegistryOptions::default()
        }
    }
}

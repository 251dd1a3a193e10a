//! Address and salt prediction commands

use std::path::PathBuf;

use clap::Subcommand;
use diamond_address::{
    create2, derive_salt, Artifact, ChainBinding, SaltInputs, SaltPolicy, TwoPhaseInputs,
    TwoPhasePredictor,
};
use diamond_types::{hex, DEFAULT_SINGLETON_DEPLOYER};
use serde::Serialize;

use crate::commands::{artifact_set, parse_address, resolve_nonce, resolve_version};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::exit;
use crate::output::{print_field, print_single, print_warning, OutputFormat};

/// Prediction subcommands
#[derive(Debug, Subcommand)]
pub enum PredictCommands {
    /// CREATE2 address from a deployer, salt and init code
    Address {
        /// Deploying contract
        #[arg(long)]
        deployer: String,

        /// 32-byte salt
        #[arg(long, env = "DIAMOND_SALT")]
        salt: Option<String>,

        /// keccak256 of the init code
        #[arg(long, conflicts_with = "init_code", required_unless_present = "init_code")]
        init_code_hash: Option<String>,

        /// File holding `0x` hex init code
        #[arg(long)]
        init_code: Option<PathBuf>,
    },

    /// Derive a salt under a named policy
    Salt {
        /// factory-v1, target-global-v1, target-global-literal-v1 or target-chain-v1
        #[arg(long)]
        policy: String,

        /// File holding the `0x` hex content the salt is addressed by
        #[arg(long)]
        content: PathBuf,

        #[arg(long, env = "DIAMOND_VERSION")]
        version: Option<String>,

        #[arg(long, env = "DIAMOND_NONCE")]
        nonce: Option<String>,

        /// Chain binding for chain-scoped policies
        #[arg(long, requires = "deployer")]
        chain_id: Option<u64>,

        #[arg(long, requires = "chain_id")]
        deployer: Option<String>,
    },

    /// Factory and target addresses for the two-phase scheme
    TwoPhase {
        #[arg(long)]
        factory_code: PathBuf,

        #[arg(long)]
        target_code: PathBuf,

        /// Stand-in when the target artifact is missing
        #[arg(long)]
        fallback_code: Option<PathBuf>,

        /// Permit the fallback to stand in
        #[arg(long, env = "DIAMOND_ALLOW_FALLBACK")]
        allow_fallback: bool,

        #[arg(long, env = "DIAMOND_VERSION")]
        version: Option<String>,

        #[arg(long, env = "DIAMOND_NONCE")]
        nonce: Option<String>,

        /// Singleton deployer, defaults to the canonical one
        #[arg(long)]
        singleton: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddressView {
    deployer: String,
    salt: String,
    init_code_hash: String,
    address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaltView {
    policy: SaltPolicy,
    version: String,
    nonce: String,
    content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain: Option<ChainBinding>,
    salt: String,
}

/// Execute a predict command
pub fn execute(command: PredictCommands, config: &CliConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        PredictCommands::Address {
            deployer,
            salt,
            init_code_hash,
            init_code,
        } => {
            let deployer = parse_address("deployer", &deployer)?;
            let raw_salt = salt
                .or_else(|| config.prediction.salt.clone())
                .ok_or_else(|| {
                    CliError::InvalidInput(
                        "a salt is required: --salt, DIAMOND_SALT or [prediction] salt".into(),
                    )
                })?;
            let salt = hex::parse_hash(&raw_salt)?;
            let init_code_hash = match (init_code_hash, init_code) {
                (Some(hash), _) => hex::parse_hash(&hash)?,
                (None, Some(path)) => create2::init_code_hash(&Artifact::load(path)?.init_code)?,
                (None, None) => {
                    return Err(CliError::InvalidInput(
                        "--init-code-hash or --init-code is required".into(),
                    ))
                }
            };
            let address = create2::predict_address(deployer, salt, init_code_hash);

            let view = AddressView {
                deployer: hex::encode_address(&deployer),
                salt: hex::encode_hash(&salt),
                init_code_hash: hex::encode_hash(&init_code_hash),
                address: hex::encode_address(&address),
            };
            if format.is_human() {
                print_field("Deployer", &view.deployer);
                print_field("Salt", &view.salt);
                print_field("Init code hash", &view.init_code_hash);
                print_field("Address", &view.address);
            } else {
                print_single(&view, format)?;
            }
            Ok(exit::PASS)
        }

        PredictCommands::Salt {
            policy,
            content,
            version,
            nonce,
            chain_id,
            deployer,
        } => {
            let policy: SaltPolicy = policy.parse()?;
            let artifact = Artifact::load(content)?;
            let inputs = SaltInputs::new(
                artifact.init_code,
                resolve_version(version, config)?,
                resolve_nonce(nonce, config)?,
            );
            let chain = match (chain_id, deployer) {
                (Some(chain_id), Some(deployer)) => Some(ChainBinding {
                    chain_id,
                    deployer: parse_address("deployer", &deployer)?,
                }),
                _ => None,
            };
            let derived = derive_salt(policy, &inputs, chain.as_ref())?;

            let view = SaltView {
                policy,
                version: inputs.version.clone(),
                nonce: inputs.nonce.to_string(),
                content_hash: hex::encode_hash(&inputs.content_hash()),
                chain,
                salt: hex::encode_hash(&derived),
            };
            if format.is_human() {
                print_field("Policy", view.policy);
                print_field("Version", &view.version);
                print_field("Nonce", &view.nonce);
                print_field("Content hash", &view.content_hash);
                if let Some(chain) = &view.chain {
                    print_field("Chain id", chain.chain_id);
                    print_field("Chain deployer", hex::encode_address(&chain.deployer));
                }
                print_field("Salt", &view.salt);
            } else {
                print_single(&view, format)?;
            }
            Ok(exit::PASS)
        }

        PredictCommands::TwoPhase {
            factory_code,
            target_code,
            fallback_code,
            allow_fallback,
            version,
            nonce,
            singleton,
        } => {
            let singleton = match singleton {
                Some(raw) => parse_address("singleton", &raw)?,
                None => DEFAULT_SINGLETON_DEPLOYER,
            };
            let inputs = TwoPhaseInputs {
                factory_init_code: Artifact::load(factory_code)?.init_code,
                target: artifact_set(&target_code, fallback_code.as_deref())?,
                version: resolve_version(version, config)?,
                nonce: resolve_nonce(nonce, config)?,
                allow_fallback: allow_fallback || config.allow_fallback_artifact,
            };
            let prediction = TwoPhasePredictor::new(singleton).predict(&inputs)?;

            if format.is_human() {
                print_field("Singleton deployer", hex::encode_address(&prediction.singleton_deployer));
                print_field("Factory policy", prediction.factory_policy);
                print_field("Factory salt", hex::encode_hash(&prediction.factory_salt));
                print_field("Factory address", hex::encode_address(&prediction.factory_address));
                print_field("Target policy", prediction.target_policy);
                print_field("Target artifact", &prediction.target_artifact);
                print_field("Target salt", hex::encode_hash(&prediction.target_salt));
                print_field("Target address", hex::encode_address(&prediction.target_address));
                if let Some(substitution) = &prediction.substitution {
                    print_warning(&format!(
                        "Predicted from fallback {} in place of {}",
                        substitution.fallback, substitution.primary
                    ));
                }
            } else {
                print_single(&prediction, format)?;
            }
            Ok(exit::PASS)
        }
    }
}

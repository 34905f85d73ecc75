use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");
    if !args.extended {
        println!("{name} {version}");
        return Ok(SUCCESS);
    }

    println!("name: {name}");
    println!("version: {version}");
    println!("protocol: ME ({} byte header)", meecu_proto::HEADER_SIZE);
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "build_target: {}",
        option_env!("MEECU_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "features: serde={}, async={}, cli=true",
        cfg!(feature = "serde"),
        cfg!(feature = "async")
    );

    Ok(SUCCESS)
}

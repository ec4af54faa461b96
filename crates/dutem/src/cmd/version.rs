use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("dutem {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: dutem");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("DUTEM_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: cli=true, embedded-can={}",
        cfg!(feature = "embedded-can")
    );
    println!(
        "defaults: base_id=0x{:08X}, sensors={}",
        dutem_frame::DEFAULT_BASE_ID,
        dutem_frame::DEFAULT_SENSOR_COUNT
    );

    Ok(SUCCESS)
}

//! Push a small interface baseline to an SR Linux node and read it back.
//!
//! ```sh
//! SHELLWIRE_USER=admin SHELLWIRE_PASSWORD=admin \
//!     cargo run --example push_config -- netlab-core-srl1
//! ```

use std::env;
use std::error::Error;
use std::time::Duration;

use shellwire::transport::{Credentials, DumpLevel, SshTransport};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let host = env::args()
        .nth(1)
        .unwrap_or_else(|| "netlab-core-srl1".to_string());
    let user = env::var("SHELLWIRE_USER").unwrap_or_else(|_| "admin".to_string());
    let password = env::var("SHELLWIRE_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let mut transport = SshTransport::new("srl")?
        .with_credentials(Credentials::password(user, password))
        .with_dump_level(DumpLevel::Replies);

    transport.connect(&host).await?;
    if let Some(login) = transport.login_message() {
        println!("device ready, prompt: {}", login.prompt);
    }

    let version = transport.run("show version", Duration::from_secs(5)).await;
    println!("{}", version.result);

    let snippet = "\
# first front-panel port
set interface ethernet-1/1 admin-state enable
set interface ethernet-1/1 description uplink
";
    transport.write(snippet, "iface-baseline").await?;

    // Read-only verification pass, no transaction.
    transport
        .write("show interface ethernet-1/1\n", "show-iface")
        .await?;

    transport.close().await;
    Ok(())
}

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

pub const MERCHANT_ACCOUNT: &str = "merch1";
pub const SECRET_KEY: &str = "secret";

/// The binary with merchant credentials supplied through the environment.
pub fn gateway_cmd() -> Command {
    let mut cmd = Command::new(cargo_bin!("wayforpay"));
    cmd.env("WAYFORPAY_MERCHANT_ACCOUNT", MERCHANT_ACCOUNT)
        .env("WAYFORPAY_SECRET_KEY", SECRET_KEY)
        .env_remove("WAYFORPAY_ENDPOINT");
    cmd
}

pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

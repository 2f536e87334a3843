//! Generate a fresh local EVM key pair for receiving payments.

use alloy::signers::local::PrivateKeySigner;
use x402_ops::{env, keys};

fn main() {
    env::init();

    let chain = env::chain();
    let signer = PrivateKeySigner::random();
    let address = signer.address();

    println!("\nServer Wallet Setup\n");
    println!("{}", env::rule());
    println!("\nAdd this to your .env.local file:\n");
    println!("SERVER_WALLET_ADDRESS={address}");
    println!("\nPrivate key (store it offline; the server never needs it):\n");
    println!("{}", keys::private_key_hex(&signer));
    println!("\n{}", env::rule());
    println!("\nWallet Details:");
    println!("   Address: {address}");
    println!("   Network: {} ({})", chain.label, chain.network);
    println!("   Explorer: {}", chain.address_url(address));
    println!("\nNext Steps:");
    println!("   1. Copy SERVER_WALLET_ADDRESS to your .env.local");
    if chain.chain_id == x402::BASE_SEPOLIA_CHAIN_ID {
        println!("   2. Get testnet USDC from https://faucet.circle.com (Base Sepolia)");
    } else {
        println!("   2. Fund a buyer wallet with USDC on Base to test payments");
    }
    println!("   3. Run x402-market to start the marketplace\n");
}

//! Order types for Polymarket CLOB signing.
//!
//! Defines the order struct signed under the CTF exchange domain, the
//! signed order handed to the network layer, and the builder that turns
//! human order arguments into signed orders.

use alloy_primitives::{Address, B256, U256};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::domain::{contract_config, TypedDataDomain};
use super::eip712::{hash_struct, typed_data_digest, TypedDataField, Types};
use super::signer::Signer;
use crate::amounts::{
    calculate_market_price, get_market_order_amounts, get_order_amounts, price_valid,
    round_normal, OrderAmounts,
};
use crate::types::{
    CreateOrderOptions, MarketOrderArgs, OrderArgs, OrderType, PriceLevel, Side, SignatureType,
};
use crate::utils::{checksum, parse_u256};
use crate::{Error, Result};

/// EIP-712 primary type name of an order.
pub const ORDER_PRIMARY_TYPE: &str = "Order";

/// Salts stay below 2^53 so they survive as JSON numbers.
const SALT_MASK: u64 = (1u64 << 53) - 1;

/// Member list of the exchange `Order` struct.
pub fn order_types() -> Types {
    let fields = [
        ("salt", "uint256"),
        ("maker", "address"),
        ("signer", "address"),
        ("taker", "address"),
        ("tokenId", "uint256"),
        ("makerAmount", "uint256"),
        ("takerAmount", "uint256"),
        ("expiration", "uint256"),
        ("nonce", "uint256"),
        ("feeRateBps", "uint256"),
        ("side", "uint8"),
        ("signatureType", "uint8"),
    ];

    let mut types = Types::new();
    types.insert(
        ORDER_PRIMARY_TYPE.to_string(),
        fields
            .iter()
            .map(|(name, kind)| TypedDataField::new(*name, *kind))
            .collect(),
    );
    types
}

/// Order data as signed by the CTF exchange contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Random salt for uniqueness.
    pub salt: u64,
    /// Funder of the order (proxy wallet or the signer itself).
    pub maker: Address,
    /// Address whose key produced the signature.
    pub signer: Address,
    /// Taker address (zero for any taker).
    pub taker: Address,
    /// Outcome token id.
    pub token_id: U256,
    /// Maker amount in base units.
    pub maker_amount: u64,
    /// Taker amount in base units.
    pub taker_amount: u64,
    /// Unix seconds, zero for no expiry.
    pub expiration: u64,
    pub nonce: u64,
    /// Fee rate in basis points.
    pub fee_rate_bps: u64,
    pub side: Side,
    pub signature_type: SignatureType,
}

impl Order {
    /// The typed data message for this order.
    pub fn to_message(&self) -> Value {
        json!({
            "salt": self.salt.to_string(),
            "maker": checksum(&self.maker),
            "signer": checksum(&self.signer),
            "taker": checksum(&self.taker),
            "tokenId": self.token_id.to_string(),
            "makerAmount": self.maker_amount.to_string(),
            "takerAmount": self.taker_amount.to_string(),
            "expiration": self.expiration.to_string(),
            "nonce": self.nonce.to_string(),
            "feeRateBps": self.fee_rate_bps.to_string(),
            "side": self.side.as_u8(),
            "signatureType": self.signature_type.as_u8(),
        })
    }

    /// Compute the EIP-712 struct hash for this order.
    pub fn struct_hash(&self) -> Result<B256> {
        hash_struct(ORDER_PRIMARY_TYPE, &self.to_message(), &order_types())
    }

    /// Digest signed under `domain`.
    pub fn signing_hash(&self, domain: &TypedDataDomain) -> Result<B256> {
        Ok(typed_data_digest(domain.separator(), self.struct_hash()?))
    }
}

/// An order with its signature, ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOrder {
    pub order: Order,
    /// 65-byte `0x` hex signature.
    pub signature: String,
    pub order_type: OrderType,
    /// API key of the poster; filled in by the client when posting.
    pub owner: String,
}

/// Wire form of an order inside a post-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderJson {
    /// Order salt (must be a JSON number).
    pub salt: u64,
    pub maker: String,
    pub signer: String,
    pub taker: String,
    pub token_id: String,
    pub maker_amount: String,
    pub taker_amount: String,
    pub expiration: String,
    pub nonce: String,
    pub fee_rate_bps: String,
    /// "BUY" or "SELL".
    pub side: Side,
    pub signature_type: u8,
    pub signature: String,
}

/// Body of a post-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub order: OrderJson,
    pub owner: String,
    pub order_type: OrderType,
}

impl SignedOrder {
    /// Build the post-order body for `owner`.
    pub fn to_payload(&self, owner: &str, order_type: OrderType) -> OrderPayload {
        let order = &self.order;
        OrderPayload {
            order: OrderJson {
                salt: order.salt,
                maker: checksum(&order.maker),
                signer: checksum(&order.signer),
                taker: checksum(&order.taker),
                token_id: order.token_id.to_string(),
                maker_amount: order.maker_amount.to_string(),
                taker_amount: order.taker_amount.to_string(),
                expiration: order.expiration.to_string(),
                nonce: order.nonce.to_string(),
                fee_rate_bps: order.fee_rate_bps.to_string(),
                side: order.side,
                signature_type: order.signature_type.as_u8(),
                signature: self.signature.clone(),
            },
            owner: owner.to_string(),
            order_type,
        }
    }
}

/// Random order salt below 2^53.
pub fn generate_salt() -> u64 {
    rand::thread_rng().gen::<u64>() & SALT_MASK
}

/// Builds and signs orders for one signer.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    signer: Signer,
    signature_type: SignatureType,
    funder: Address,
}

impl OrderBuilder {
    /// Create a builder. The funder defaults to the signer's own address.
    pub fn new(signer: Signer, signature_type: SignatureType, funder: Option<Address>) -> Self {
        let funder = funder.unwrap_or_else(|| signer.address());
        Self {
            signer,
            signature_type,
            funder,
        }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn funder(&self) -> Address {
        self.funder
    }

    /// Create and sign a limit order. The result is GTC until posted otherwise.
    pub fn create_order(
        &self,
        args: &OrderArgs,
        options: &CreateOrderOptions,
    ) -> Result<SignedOrder> {
        check_price(args.price, options)?;
        let amounts = get_order_amounts(
            args.side,
            args.size,
            args.price,
            &options.tick_size.round_config(),
        )?;

        let order = self.build_order(
            &args.token_id,
            amounts,
            args.taker,
            args.expiration,
            args.nonce,
            args.fee_rate_bps,
        )?;
        self.sign_order(order, options, OrderType::Gtc)
    }

    /// Create and sign a market order at the price given in `args`.
    pub fn create_market_order(
        &self,
        args: &MarketOrderArgs,
        options: &CreateOrderOptions,
    ) -> Result<SignedOrder> {
        let price = args
            .price
            .ok_or_else(|| Error::invalid_value("price", "market order price must be provided"))?;
        self.market_order_at(args, options, price)
    }

    /// Create and sign a market order, discovering the price from `levels`
    /// when `args.price` is absent.
    pub fn create_market_order_from_book(
        &self,
        args: &MarketOrderArgs,
        options: &CreateOrderOptions,
        levels: &[PriceLevel],
    ) -> Result<SignedOrder> {
        let price = match args.price {
            Some(price) => price,
            None => calculate_market_price(args.side, levels, args.amount, args.order_type)?,
        };
        debug!(side = %args.side, %price, "Market order price");
        self.market_order_at(args, options, price)
    }

    fn market_order_at(
        &self,
        args: &MarketOrderArgs,
        options: &CreateOrderOptions,
        price: Decimal,
    ) -> Result<SignedOrder> {
        check_price(price, options)?;
        let amounts = get_market_order_amounts(
            args.side,
            args.amount,
            price,
            &options.tick_size.round_config(),
        )?;

        let order = self.build_order(
            &args.token_id,
            amounts,
            args.taker,
            0,
            args.nonce,
            args.fee_rate_bps,
        )?;
        self.sign_order(order, options, args.order_type)
    }

    fn build_order(
        &self,
        token_id: &str,
        amounts: OrderAmounts,
        taker: Address,
        expiration: u64,
        nonce: u64,
        fee_rate_bps: u64,
    ) -> Result<Order> {
        Ok(Order {
            salt: generate_salt(),
            maker: self.funder,
            signer: self.signer.address(),
            taker,
            token_id: parse_u256(token_id)?,
            maker_amount: amounts.maker_amount,
            taker_amount: amounts.taker_amount,
            expiration,
            nonce,
            fee_rate_bps,
            side: amounts.side,
            signature_type: self.signature_type,
        })
    }

    /// Sign an order under the exchange domain selected by `options`.
    pub fn sign_order(
        &self,
        order: Order,
        options: &CreateOrderOptions,
        order_type: OrderType,
    ) -> Result<SignedOrder> {
        let contracts = contract_config(self.signer.chain_id(), options.neg_risk)?;
        let domain = TypedDataDomain::exchange(self.signer.chain_id(), contracts.exchange);
        let signature = self.signer.sign(order.signing_hash(&domain)?.as_slice())?;

        info!(
            token_id = %order.token_id,
            side = %order.side,
            maker_amount = order.maker_amount,
            taker_amount = order.taker_amount,
            neg_risk = options.neg_risk,
            "Signed order"
        );

        Ok(SignedOrder {
            order,
            signature,
            order_type,
            owner: String::new(),
        })
    }
}

/// Validate the price as it will be signed, i.e. rounded to the tick's price decimals.
fn check_price(price: Decimal, options: &CreateOrderOptions) -> Result<()> {
    let rounded = round_normal(price, options.tick_size.round_config().price);
    if price_valid(rounded, options.tick_size) {
        Ok(())
    } else {
        Err(Error::invalid_value(
            "price",
            format!(
                "{price} outside [{tick}, 1 - {tick}]",
                tick = options.tick_size
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::TickSize;
    use std::str::FromStr;

    // Test private key (DO NOT USE IN PRODUCTION)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    const TOKEN_ID: &str =
        "71321045679252212594626385532706912750332728571942532289631379312455583992563";

    mod sol {
        alloy_sol_types::sol! {
            struct Order {
                uint256 salt;
                address maker;
                address signer;
                address taker;
                uint256 tokenId;
                uint256 makerAmount;
                uint256 takerAmount;
                uint256 expiration;
                uint256 nonce;
                uint256 feeRateBps;
                uint8 side;
                uint8 signatureType;
            }
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn builder() -> OrderBuilder {
        let signer = Signer::new(TEST_PRIVATE_KEY, 137).unwrap();
        OrderBuilder::new(signer, SignatureType::Eoa, None)
    }

    fn options() -> CreateOrderOptions {
        CreateOrderOptions {
            tick_size: TickSize::Hundredth,
            neg_risk: false,
        }
    }

    fn fixed_order() -> Order {
        let signer = Signer::new(TEST_PRIVATE_KEY, 137).unwrap();
        Order {
            salt: 479249096354,
            maker: signer.address(),
            signer: signer.address(),
            taker: Address::ZERO,
            token_id: parse_u256(TOKEN_ID).unwrap(),
            maker_amount: 50_000_000,
            taker_amount: 100_000_000,
            expiration: 0,
            nonce: 0,
            fee_rate_bps: 0,
            side: Side::Buy,
            signature_type: SignatureType::Eoa,
        }
    }

    #[test]
    fn test_order_type_string() {
        assert_eq!(
            super::super::eip712::encode_type(ORDER_PRIMARY_TYPE, &order_types()).unwrap(),
            "Order(uint256 salt,address maker,address signer,address taker,uint256 tokenId,uint256 makerAmount,uint256 takerAmount,uint256 expiration,uint256 nonce,uint256 feeRateBps,uint8 side,uint8 signatureType)"
        );
    }

    #[test]
    fn test_order_hash_matches_sol_struct() {
        use alloy_sol_types::SolStruct;

        let order = fixed_order();
        let contracts = contract_config(137, false).unwrap();
        let domain = TypedDataDomain::exchange(137, contracts.exchange);

        let sol_order = sol::Order {
            salt: U256::from(order.salt),
            maker: order.maker,
            signer: order.signer,
            taker: order.taker,
            tokenId: order.token_id,
            makerAmount: U256::from(order.maker_amount),
            takerAmount: U256::from(order.taker_amount),
            expiration: U256::ZERO,
            nonce: U256::ZERO,
            feeRateBps: U256::ZERO,
            side: 0,
            signatureType: 0,
        };
        let alloy_domain = alloy_sol_types::eip712_domain! {
            name: "Polymarket CTF Exchange",
            version: "1",
            chain_id: 137,
            verifying_contract: contracts.exchange,
        };

        assert_eq!(order.struct_hash().unwrap(), sol_order.eip712_hash_struct());
        assert_eq!(
            order.signing_hash(&domain).unwrap(),
            sol_order.eip712_signing_hash(&alloy_domain)
        );
    }

    #[test]
    fn test_create_order_amounts_and_fields() {
        let builder = builder();
        let args = OrderArgs::new(TOKEN_ID, dec("0.50"), dec("100"), Side::Buy);
        let signed = builder.create_order(&args, &options()).unwrap();

        assert_eq!(signed.order.maker_amount, 50_000_000);
        assert_eq!(signed.order.taker_amount, 100_000_000);
        assert_eq!(signed.order.maker, builder.signer().address());
        assert_eq!(signed.order.signer, builder.signer().address());
        assert_eq!(signed.order.expiration, 0);
        assert_eq!(signed.order_type, OrderType::Gtc);
        assert!(signed.order.salt <= SALT_MASK);
        assert_eq!(signed.signature.len(), 132);
    }

    #[test]
    fn test_signature_recovers_to_signer() {
        let builder = builder();
        let args = OrderArgs::new(TOKEN_ID, dec("0.42"), dec("10"), Side::Sell);
        let signed = builder.create_order(&args, &options()).unwrap();

        let contracts = contract_config(137, false).unwrap();
        let digest = signed
            .order
            .signing_hash(&TypedDataDomain::exchange(137, contracts.exchange))
            .unwrap();
        let raw = crate::utils::hex_to_bytes(&signed.signature).unwrap();
        let signature = alloy_primitives::Signature::from_raw(&raw).unwrap();
        assert_eq!(
            signature.recover_address_from_prehash(&digest).unwrap(),
            builder.signer().address()
        );
    }

    #[test]
    fn test_signing_is_deterministic_for_fixed_salt() {
        let builder = builder();
        let first = builder
            .sign_order(fixed_order(), &options(), OrderType::Gtc)
            .unwrap();
        let second = builder
            .sign_order(fixed_order(), &options(), OrderType::Gtc)
            .unwrap();
        assert_eq!(first.signature, second.signature);

        let neg_risk = builder
            .sign_order(
                fixed_order(),
                &CreateOrderOptions {
                    tick_size: TickSize::Hundredth,
                    neg_risk: true,
                },
                OrderType::Gtc,
            )
            .unwrap();
        assert_ne!(first.signature, neg_risk.signature);
    }

    #[test]
    fn test_funder_and_signature_type() {
        let signer = Signer::new(TEST_PRIVATE_KEY, 137).unwrap();
        let funder = crate::utils::parse_address("0x2791bca1f2de4661ed88a30c99a7a9449aa84174")
            .unwrap();
        let builder = OrderBuilder::new(signer, SignatureType::PolyGnosisSafe, Some(funder));

        let args = OrderArgs::new(TOKEN_ID, dec("0.50"), dec("10"), Side::Buy);
        let signed = builder.create_order(&args, &options()).unwrap();
        assert_eq!(signed.order.maker, funder);
        assert_ne!(signed.order.signer, funder);
        assert_eq!(signed.order.signature_type, SignatureType::PolyGnosisSafe);
    }

    #[test]
    fn test_invalid_price_rejected() {
        let builder = builder();
        let args = OrderArgs::new(TOKEN_ID, dec("0.995"), dec("10"), Side::Buy);
        assert!(matches!(
            builder.create_order(&args, &options()),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_price_checked_after_rounding_to_tick() {
        let builder = builder();
        let args = OrderArgs::new(TOKEN_ID, dec("0.0095"), dec("100"), Side::Buy);
        let signed = builder.create_order(&args, &options()).unwrap();

        // 0.0095 rounds to the 0.01 tick
        assert_eq!(signed.order.maker_amount, 1_000_000);
        assert_eq!(signed.order.taker_amount, 100_000_000);

        let below = OrderArgs::new(TOKEN_ID, dec("0.0049"), dec("100"), Side::Buy);
        assert!(matches!(
            builder.create_order(&below, &options()),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unsupported_chain() {
        let signer = Signer::new(TEST_PRIVATE_KEY, 1).unwrap();
        let builder = OrderBuilder::new(signer, SignatureType::Eoa, None);
        let args = OrderArgs::new(TOKEN_ID, dec("0.50"), dec("10"), Side::Buy);
        assert!(matches!(
            builder.create_order(&args, &options()),
            Err(Error::UnsupportedChain(1))
        ));
    }

    #[test]
    fn test_market_order_requires_price() {
        let builder = builder();
        let args = MarketOrderArgs::new(TOKEN_ID, dec("10"), Side::Buy);
        assert!(matches!(
            builder.create_market_order(&args, &options()),
            Err(Error::InvalidValue { .. })
        ));

        let priced = MarketOrderArgs {
            price: Some(dec("0.56")),
            ..args
        };
        let signed = builder.create_market_order(&priced, &options()).unwrap();
        assert_eq!(signed.order.maker_amount, 10_000_000);
        assert_eq!(signed.order.taker_amount, 17_857_100);
        assert_eq!(signed.order.expiration, 0);
        assert_eq!(signed.order_type, OrderType::Fok);
    }

    #[test]
    fn test_market_order_from_book() {
        let builder = builder();
        let asks = vec![
            PriceLevel::new(dec("0.50"), dec("100")),
            PriceLevel::new(dec("0.51"), dec("200")),
        ];
        let args = MarketOrderArgs::new(TOKEN_ID, dec("100"), Side::Buy);
        let signed = builder
            .create_market_order_from_book(&args, &options(), &asks)
            .unwrap();
        // 100 collateral clears at 0.51
        assert_eq!(signed.order.maker_amount, 100_000_000);
        assert_eq!(signed.order.taker_amount, 196_078_400);

        assert!(matches!(
            builder.create_market_order_from_book(&args, &options(), &[]),
            Err(Error::NoMatch)
        ));
    }

    #[test]
    fn test_payload_shape() {
        let builder = builder();
        let signed = builder
            .sign_order(fixed_order(), &options(), OrderType::Gtc)
            .unwrap();
        let payload = serde_json::to_value(signed.to_payload("api-key", OrderType::Fok)).unwrap();

        assert_eq!(payload["owner"], "api-key");
        assert_eq!(payload["orderType"], "FOK");
        let order = &payload["order"];
        assert!(order["salt"].is_u64());
        assert_eq!(order["salt"], 479249096354u64);
        assert_eq!(order["side"], "BUY");
        assert_eq!(order["makerAmount"], "50000000");
        assert_eq!(order["tokenId"], TOKEN_ID);
        assert_eq!(order["signatureType"], 0);
        assert_eq!(order["maker"], "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(order["signature"], signed.signature);
    }

    #[test]
    fn test_salt_masked() {
        for _ in 0..64 {
            assert!(generate_salt() <= SALT_MASK);
        }
    }
}

//! Compact calldata frames.
//!
//! A frame is `command:u8 | market_id:u8 | payload`, all integers big
//! endian, usually carried as a `0x`-prefixed hex string:
//!
//! | Command | Payload |
//! |---------|---------|
//! | `0x01` create limit batch | `count:u8`, then `amount0_base:u64 price_base:u64 is_ask:u8 hint:u32` per order |
//! | `0x02` update batch | `count:u8`, then `id:u32 amount0_base:u64 price_base:u64 hint:u32` per order |
//! | `0x03` cancel batch | `count:u8`, then `id:u32` per order |
//! | `0x04` market order | `amount0_base:u64 price_base:u64 is_ask:u8` |

use crate::error::RouterError;
use crate::types::Side;

pub const CREATE_LIMIT_BATCH: u8 = 0x01;
pub const UPDATE_LIMIT_BATCH: u8 = 0x02;
pub const CANCEL_LIMIT_BATCH: u8 = 0x03;
pub const MARKET_ORDER: u8 = 0x04;

/// One limit order of a create batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitRequest {
    pub amount0_base: u64,
    pub price_base: u64,
    pub is_ask: bool,
    pub hint: u32,
}

/// One element of an update batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    pub id: u32,
    pub amount0_base: u64,
    pub price_base: u64,
    pub hint: u32,
}

/// A market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketRequest {
    pub amount0_base: u64,
    pub price_base: u64,
    pub is_ask: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateLimitBatch(Vec<LimitRequest>),
    UpdateLimitBatch(Vec<UpdateRequest>),
    CancelLimitBatch(Vec<u32>),
    MarketOrder(MarketRequest),
}

impl Command {
    pub fn code(&self) -> u8 {
        match self {
            Command::CreateLimitBatch(_) => CREATE_LIMIT_BATCH,
            Command::UpdateLimitBatch(_) => UPDATE_LIMIT_BATCH,
            Command::CancelLimitBatch(_) => CANCEL_LIMIT_BATCH,
            Command::MarketOrder(_) => MARKET_ORDER,
        }
    }

    /// Number of market operations the command carries
    pub fn len(&self) -> usize {
        match self {
            Command::CreateLimitBatch(orders) => orders.len(),
            Command::UpdateLimitBatch(orders) => orders.len(),
            Command::CancelLimitBatch(ids) => ids.len(),
            Command::MarketOrder(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded frame addressed to one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub market_id: u8,
    pub command: Command,
}

impl Frame {
    pub fn new(market_id: u8, command: Command) -> Self {
        Self { market_id, command }
    }

    /// Decode `0x`-prefixed (or bare) hex calldata.
    pub fn from_hex(calldata: &str) -> Result<Self, RouterError> {
        let trimmed = calldata.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        Self::decode(&hex::decode(digits)?)
    }

    /// Decode raw calldata bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, RouterError> {
        if bytes.is_empty() {
            return Err(RouterError::EmptyFrame);
        }
        let mut reader = Reader::new(bytes);
        let code = reader.u8()?;
        let market_id = reader.u8()?;

        let command = match code {
            CREATE_LIMIT_BATCH => {
                let count = reader.u8()?;
                let mut orders = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    orders.push(LimitRequest {
                        amount0_base: reader.u64()?,
                        price_base: reader.u64()?,
                        is_ask: reader.side()?.is_ask(),
                        hint: reader.u32()?,
                    });
                }
                Command::CreateLimitBatch(orders)
            }
            UPDATE_LIMIT_BATCH => {
                let count = reader.u8()?;
                let mut orders = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    orders.push(UpdateRequest {
                        id: reader.u32()?,
                        amount0_base: reader.u64()?,
                        price_base: reader.u64()?,
                        hint: reader.u32()?,
                    });
                }
                Command::UpdateLimitBatch(orders)
            }
            CANCEL_LIMIT_BATCH => {
                let count = reader.u8()?;
                let ids = (0..count).map(|_| reader.u32()).collect::<Result<Vec<_>, _>>()?;
                Command::CancelLimitBatch(ids)
            }
            MARKET_ORDER => Command::MarketOrder(MarketRequest {
                amount0_base: reader.u64()?,
                price_base: reader.u64()?,
                is_ask: reader.side()?.is_ask(),
            }),
            other => return Err(RouterError::UnknownCommand(other)),
        };

        reader.finish()?;
        Ok(Frame { market_id, command })
    }

    /// Encode to raw calldata. A batch must fit its count byte.
    pub fn encode(&self) -> Result<Vec<u8>, RouterError> {
        let mut out = vec![self.command.code(), self.market_id];
        match &self.command {
            Command::CreateLimitBatch(orders) => {
                out.push(count_byte(orders.len())?);
                for o in orders {
                    out.extend_from_slice(&o.amount0_base.to_be_bytes());
                    out.extend_from_slice(&o.price_base.to_be_bytes());
                    out.push(Side::from_is_ask(o.is_ask).to_u8());
                    out.extend_from_slice(&o.hint.to_be_bytes());
                }
            }
            Command::UpdateLimitBatch(orders) => {
                out.push(count_byte(orders.len())?);
                for o in orders {
                    out.extend_from_slice(&o.id.to_be_bytes());
                    out.extend_from_slice(&o.amount0_base.to_be_bytes());
                    out.extend_from_slice(&o.price_base.to_be_bytes());
                    out.extend_from_slice(&o.hint.to_be_bytes());
                }
            }
            Command::CancelLimitBatch(ids) => {
                out.push(count_byte(ids.len())?);
                for id in ids {
                    out.extend_from_slice(&id.to_be_bytes());
                }
            }
            Command::MarketOrder(o) => {
                out.extend_from_slice(&o.amount0_base.to_be_bytes());
                out.extend_from_slice(&o.price_base.to_be_bytes());
                out.push(Side::from_is_ask(o.is_ask).to_u8());
            }
        }
        Ok(out)
    }

    /// `0x`-prefixed hex calldata
    pub fn to_hex(&self) -> Result<String, RouterError> {
        Ok(format!("0x{}", hex::encode(self.encode()?)))
    }
}

fn count_byte(len: usize) -> Result<u8, RouterError> {
    u8::try_from(len).map_err(|_| RouterError::BatchTooLarge(len))
}

/// Big-endian cursor over calldata.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], RouterError> {
        let end = self.offset + N;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or_else(|| RouterError::Truncated {
                offset: self.offset,
                needed: end - self.bytes.len(),
            })?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        self.offset = end;
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, RouterError> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, RouterError> {
        Ok(u32::from_be_bytes(self.take()?))
    }

    fn u64(&mut self) -> Result<u64, RouterError> {
        Ok(u64::from_be_bytes(self.take()?))
    }

    fn side(&mut self) -> Result<Side, RouterError> {
        let offset = self.offset;
        let value = self.u8()?;
        Side::from_u8(value).ok_or(RouterError::InvalidSide { offset, value })
    }

    fn finish(&self) -> Result<(), RouterError> {
        match self.bytes.len() - self.offset {
            0 => Ok(()),
            extra => Err(RouterError::TrailingBytes(extra)),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

//! The programmable-transaction model: a flat list of inputs plus an ordered
//! list of commands referencing them. Construction is fully deterministic —
//! identical calls produce identical bytes.

use crate::{
    error::SkittyError,
    move_type::MoveCallTarget,
    types::{ObjectId, SuiAddress},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Input {
    /// An owned object passed by reference; resolved to a full object ref at
    /// build time
    Object(ObjectId),
    /// A bcs-encoded literal
    Pure(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    /// The transaction's gas coin
    GasCoin,
    /// An entry in the input list
    Input(u16),
    /// The result of a prior command
    Result(u16),
    /// One element of a prior command's result list
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall {
        package: SuiAddress,
        module: String,
        function: String,
        type_arguments: Vec<String>,
        arguments: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionKind {
    pub inputs: Vec<Input>,
    pub commands: Vec<Command>,
}

impl TransactionKind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object input, reusing the existing slot when the same
    /// object was already added
    pub fn obj(&mut self, id: ObjectId) -> Argument {
        let wanted = Input::Object(id);
        if let Some(idx) = self.inputs.iter().position(|input| *input == wanted) {
            return Argument::Input(idx as u16);
        }
        self.inputs.push(wanted);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    pub fn pure_u64(&mut self, value: u64) -> Result<Argument, SkittyError> {
        let bytes = bcs::to_bytes(&value)?;
        self.inputs.push(Input::Pure(bytes));
        Ok(Argument::Input((self.inputs.len() - 1) as u16))
    }

    pub fn pure_address(&mut self, address: &SuiAddress) -> Result<Argument, SkittyError> {
        let bytes = bcs::to_bytes(address)?;
        self.inputs.push(Input::Pure(bytes));
        Ok(Argument::Input((self.inputs.len() - 1) as u16))
    }

    /// Append a Move call; returns the argument referencing its result
    pub fn move_call(
        &mut self,
        target: &MoveCallTarget,
        type_arguments: Vec<String>,
        arguments: Vec<Argument>,
    ) -> Argument {
        self.commands.push(Command::MoveCall {
            package: target.package,
            module: target.module.clone(),
            function: target.function.clone(),
            type_arguments,
            arguments,
        });
        Argument::Result((self.commands.len() - 1) as u16)
    }

    /// Append a coin split; returns one argument per split amount
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Vec<Argument> {
        let count = amounts.len();
        self.commands.push(Command::SplitCoins { coin, amounts });
        let command_idx = (self.commands.len() - 1) as u16;
        (0..count).map(|i| Argument::NestedResult(command_idx, i as u16)).collect()
    }

    pub fn merge_coins(&mut self, destination: Argument, sources: Vec<Argument>) {
        self.commands.push(Command::MergeCoins { destination, sources });
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, address: Argument) {
        self.commands.push(Command::TransferObjects { objects, address });
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SkittyError> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SkittyError> {
        Ok(bcs::from_bytes(bytes)?)
    }

    pub fn to_base64(&self) -> Result<String, SkittyError> {
        Ok(BASE64.encode(self.to_bytes()?))
    }

    pub fn from_base64(encoded: &str) -> Result<Self, SkittyError> {
        let bytes = BASE64.decode(encoded.trim())?;
        Self::from_bytes(&bytes)
    }
}

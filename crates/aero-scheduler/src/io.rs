use std::io::{Read, Write};

use crate::error::{Result, SchedulerError};

pub(crate) trait WriteLeExt: Write {
    fn write_u32_le(&mut self, v: u32) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn write_i32_le(&mut self, v: i32) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }
}

impl<T: Write + ?Sized> WriteLeExt for T {}

pub(crate) trait ReadLeExt: Read {
    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)
            .map_err(|_| SchedulerError::Malformed("unexpected end of state"))?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_i32_le(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)
            .map_err(|_| SchedulerError::Malformed("unexpected end of state"))?;
        Ok(i32::from_le_bytes(buf))
    }
}

impl<T: Read + ?Sized> ReadLeExt for T {}

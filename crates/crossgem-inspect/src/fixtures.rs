//! Sample `objdump -p` output and a canned inspector shared by tests.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::error::VerifyError;
use crate::inspector::Inspector;

pub(crate) const WINDOWS_DUMP: &str = "
nokogiri.so:     file format pei-x86-64

Characteristics 0x2026

The Export Tables (interpreted .edata section contents)

[Ordinal/Name Pointer] Table
\t[   0] Init_nokogiri

The Import Tables (interpreted .idata section contents)
\tDLL Name: KERNEL32.dll
\tDLL Name: msvcrt.dll
\tDLL Name: WS2_32.dll
\tDLL Name: USER32.dll
\tDLL Name: x64-msvcrt-ruby310.dll
\tDLL Name: msvcrt.dll
";

pub(crate) const LINUX_DUMP: &str = "
nokogiri.so:     file format elf64-x86-64

Dynamic Section:
  NEEDED               libm.so.6
  NEEDED               libc.so.6
  SONAME               nokogiri.so

Version References:
  required from libm.so.6:
    0x06969194 0x00 05 GLIBC_2.2.5
  required from libc.so.6:
    0x0d696914 0x00 04 GLIBC_2.4
    0x06969197 0x00 03 GLIBC_2.17
    0x06969194 0x00 02 GLIBC_2.2.5
";

/// Returns the same dump for every artifact and records the tools requested.
#[derive(Debug, Clone)]
pub(crate) struct FixtureInspector {
    text: String,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FixtureInspector {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Rc::default(),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Inspector for FixtureInspector {
    fn dump(&self, tool: &str, _artifact: &Path) -> Result<String, VerifyError> {
        self.calls.borrow_mut().push(tool.to_string());
        Ok(self.text.clone())
    }
}

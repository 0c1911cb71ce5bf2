use super::test_helpers::*;
use super::*;
use crate::config::Config;
use crate::error::{Error, ExtractorError, JobError};
use crate::extractor::{Discovery, ItemDescriptor, NoOpExtractor};
use crate::types::{JobEvent, JobId, JobStatus, NewJob};
use std::sync::Arc;
use std::time::Duration;
